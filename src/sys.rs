pub mod ax;
pub mod geometry;
#[cfg(target_os = "macos")]
pub mod macos;
pub mod screen;
#[cfg(test)]
pub mod stub;
pub mod timer;
