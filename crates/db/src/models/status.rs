//! Job lifecycle status mapping to a SMALLINT column.

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

/// Job lifecycle status.
///
/// Transitions are driven exclusively by the synthesis controller and the
/// polling scheduler: `Draft -> Waiting -> Pending -> Success | Failed`.
/// `Success` and `Failed` are terminal; nothing transitions out of them
/// automatically.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Draft = 1,
    Waiting = 2,
    Pending = 3,
    Success = 4,
    Failed = 5,
}

impl JobStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Map a database status ID back to the enum.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(Self::Draft),
            2 => Some(Self::Waiting),
            3 => Some(Self::Pending),
            4 => Some(Self::Success),
            5 => Some(Self::Failed),
            _ => None,
        }
    }

    /// True for states no automatic transition leaves.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

impl From<JobStatus> for StatusId {
    fn from(value: JobStatus) -> Self {
        value as StatusId
    }
}
