#[path = "../helpers/mod.rs"]
mod helpers;

mod asset_loading;
mod lifecycle;
mod spawning;
