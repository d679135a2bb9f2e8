use std::path::PathBuf;

#[derive(Clone)]
pub struct RunBehaviours {
    pub log_path: Option<PathBuf>,
    pub plain_stdout: bool,
}

#[cfg(test)]
impl RunBehaviours {
    pub(super) fn default() -> Self {
        Self {
            log_path: None,
            plain_stdout: true,
        }
    }

    pub(super) fn log_to(mut self, path: PathBuf) -> Self {
        self.log_path = Some(path);
        self
    }
}
