/// Ordered set of selected paths.
///
/// Insertion order is kept so the "view selected" list shows items in the
/// order they were picked. Lookups are linear, selections stay small.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    paths: Vec<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the path was not already present.
    pub fn add(&mut self, path: &str) -> bool {
        if self.contains(path) {
            return false;
        }
        self.paths.push(path.to_string());
        true
    }

    /// Returns `true` if the path was present.
    pub fn remove(&mut self, path: &str) -> bool {
        match self.paths.iter().position(|p| p == path) {
            Some(index) => {
                self.paths.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.paths.clone()
    }
}

impl<S: AsRef<str>> FromIterator<S> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = SelectionSet::new();
        for path in iter {
            set.add(path.as_ref());
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut set = SelectionSet::new();
        assert!(set.add("/a"));
        assert!(!set.add("/a"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove_absent_path() {
        let mut set: SelectionSet = ["/a", "/b"].into_iter().collect();
        assert!(!set.remove("/c"));
        assert!(set.remove("/a"));
        assert_eq!(set.to_vec(), vec!["/b".to_string()]);
    }

    #[test]
    fn test_keeps_insertion_order_and_dedups() {
        let set: SelectionSet = ["/c", "/a", "/c", "/b"].into_iter().collect();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["/c", "/a", "/b"]);
    }
}
