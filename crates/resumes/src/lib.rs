//! Resumes add-on.
//!
//! Saving a resume records it as a member contribution. The link is made with a
//! `post_save` receiver connected by [`init_signals`].

pub mod contribution;
pub mod resume;
pub mod signals;

pub use contribution::{Contributable, Contribution, ContributionLog};
pub use resume::{Resume, ResumeBoard, ResumeId};
pub use signals::{SAVE_CONTRIBUTION_UID, init_signals, save_contribution};
