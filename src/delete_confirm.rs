//! 삭제 확인 상태 머신
//!
//! 첫 클릭은 확인 대기 상태로 전환만 하고, 제한 시간 안에 다시 클릭해야
//! 실제 삭제가 제출됩니다. 시간은 호출자가 넘겨주므로 타이머 없이도
//! 테스트할 수 있습니다.

use serde::Serialize;
use tokio::time::{Duration, Instant};

/// 확인 대기 제한 시간 기본값
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(5);

pub const LABEL_IDLE: &str = "Delete Selected";
pub const LABEL_CONFIRM: &str = "Confirm Deletion";
pub const CONFIRM_CLASS: &str = "confirm-delete";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmState {
    Idle,
    AwaitingConfirm { deadline: Instant },
}

/// 삭제 버튼 클릭 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteClick {
    /// 선택 항목이 없어 아무것도 하지 않음
    EmptySelection,
    /// 확인 대기 시작
    Armed { deadline: Instant },
    /// 두 번째 클릭, 삭제를 제출해야 함
    Confirmed,
}

/// 삭제 버튼 표시 상태
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteButtonView {
    pub label: &'static str,
    pub confirm_class: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct DeleteConfirmation {
    state: ConfirmState,
    timeout: Duration,
    /// 폼의 delete 필드 값에 해당
    delete_intent: bool,
}

impl Default for DeleteConfirmation {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIRM_TIMEOUT)
    }
}

impl DeleteConfirmation {
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: ConfirmState::Idle,
            timeout,
            delete_intent: false,
        }
    }

    pub fn state(&self) -> ConfirmState {
        self.state
    }

    pub fn delete_intent(&self) -> bool {
        self.delete_intent
    }

    pub fn click(&mut self, now: Instant, selection_len: usize) -> DeleteClick {
        self.poll(now);

        if selection_len == 0 {
            return DeleteClick::EmptySelection;
        }

        match self.state {
            ConfirmState::Idle => {
                let deadline = now + self.timeout;
                self.state = ConfirmState::AwaitingConfirm { deadline };
                DeleteClick::Armed { deadline }
            }
            ConfirmState::AwaitingConfirm { .. } => {
                self.state = ConfirmState::Idle;
                self.delete_intent = true;
                DeleteClick::Confirmed
            }
        }
    }

    /// 제한 시간이 지났으면 대기 상태를 해제합니다. 해제했으면 `true`.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.state {
            ConfirmState::AwaitingConfirm { deadline } if now >= deadline => {
                self.state = ConfirmState::Idle;
                self.delete_intent = false;
                true
            }
            _ => false,
        }
    }

    /// 삭제 제출 후 또는 처리(process) 대화상자를 열 때 호출
    pub fn clear_intent(&mut self) {
        self.delete_intent = false;
    }

    pub fn view(&self) -> DeleteButtonView {
        match self.state {
            ConfirmState::Idle => DeleteButtonView {
                label: LABEL_IDLE,
                confirm_class: None,
            },
            ConfirmState::AwaitingConfirm { .. } => DeleteButtonView {
                label: LABEL_CONFIRM,
                confirm_class: Some(CONFIRM_CLASS),
            },
        }
    }
}
