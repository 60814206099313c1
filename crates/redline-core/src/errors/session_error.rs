/// Session orchestration errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("all {total} paragraph(s) failed to audit")]
    AllParagraphsFailed { total: usize },
}
