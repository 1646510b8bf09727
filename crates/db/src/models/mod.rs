pub mod job;
pub mod model;
pub mod status;
pub mod voice;

pub use job::{Job, JobFilter, JobPatch, NewJob};
pub use model::{Model, NewModel};
pub use status::JobStatus;
pub use voice::{NewVoice, Voice};
