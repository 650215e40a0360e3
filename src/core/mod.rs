pub mod countdown;
pub mod goal;
pub mod instant;
pub mod life;
pub mod profile;
pub mod progress;
pub mod time_tracking;

/// The single read point for the current instant. Derivation functions take
/// their instant as a parameter; everything that stamps or defaults a
/// timestamp goes through here.
pub fn now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}
