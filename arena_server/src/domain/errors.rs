// Domain-level errors surfaced at operation boundaries.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinError {
    RoomFull,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    InvalidAmount(String),
    MissingMatchAddress,
}
