pub mod attendance;
pub mod toil;
