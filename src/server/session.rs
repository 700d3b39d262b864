use super::ToolCallError;
use crate::pptx::Presentation;
use std::collections::HashMap;

/// A presentation opened through a tool call.
#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) presentation: Presentation,
    pub(crate) theme: Option<String>,
}

/// The presentations currently open, by id.
#[derive(Debug, Default)]
pub(crate) struct PresentationStore {
    sessions: HashMap<String, Session>,
    last_id: usize,
}

impl PresentationStore {
    /// Store a presentation and return its id.
    pub(crate) fn insert(&mut self, presentation: Presentation, theme: Option<String>) -> String {
        self.last_id += 1;
        let id = format!("pres_{}", self.last_id);
        self.sessions.insert(id.clone(), Session { presentation, theme });
        id
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Result<&mut Session, ToolCallError> {
        self.sessions.get_mut(id).ok_or_else(|| ToolCallError::UnknownPresentation(id.into()))
    }

    pub(crate) fn len(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ids() {
        let mut store = PresentationStore::default();
        let first = store.insert(Presentation::new(), None);
        let second = store.insert(Presentation::new(), Some("dark".into()));
        assert_eq!(first, "pres_1");
        assert_eq!(second, "pres_2");
        assert_eq!(store.len(), 2);
        assert_eq!(store.get_mut("pres_2").expect("not found").theme.as_deref(), Some("dark"));
    }

    #[test]
    fn unknown_id() {
        let mut store = PresentationStore::default();
        store.insert(Presentation::new(), None);
        let error = store.get_mut("pres_9").expect_err("found presentation");
        assert!(matches!(error, ToolCallError::UnknownPresentation(id) if id == "pres_9"));
    }
}
