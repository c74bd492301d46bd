/// Implemented by action state types which can
/// report whether an operation is currently in progress.
pub trait Busy {
  fn busy(&self) -> bool;
}
