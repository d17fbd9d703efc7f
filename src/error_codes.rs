//! 에러 코드 상수 정의
//!
//! 화면에 표시할 알림을 i18n 처리할 수 있도록 에러 코드를 문자열로 반환합니다.

/// 선택 항목 없음
pub const ERR_EMPTY_SELECTION: &str = "ERR_EMPTY_SELECTION";

/// 폴더 이름 미입력
pub const ERR_FOLDER_NAME_REQUIRED: &str = "ERR_FOLDER_NAME_REQUIRED";

/// 정리 후 비어 있는 폴더 이름
pub const ERR_INVALID_FOLDER_NAME: &str = "ERR_INVALID_FOLDER_NAME";

/// 스크립트 미선택 또는 목록에 없는 스크립트
pub const ERR_INVALID_SCRIPT: &str = "ERR_INVALID_SCRIPT";

/// 선택 동기화 실패
pub const ERR_SELECTION_SYNC_FAILED: &str = "ERR_SELECTION_SYNC_FAILED";

/// 선택 목록에서 제거 실패
pub const ERR_SELECTION_REMOVE_FAILED: &str = "ERR_SELECTION_REMOVE_FAILED";

/// 이름 변경 실패
pub const ERR_RENAME_FAILED: &str = "ERR_RENAME_FAILED";

/// 폼 제출 실패
pub const ERR_SUBMIT_FAILED: &str = "ERR_SUBMIT_FAILED";

/// 지원하지 않는 동작
pub const ERR_UNSUPPORTED_ACTION: &str = "ERR_UNSUPPORTED_ACTION";
