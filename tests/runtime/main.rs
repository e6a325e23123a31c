#[path = "../helpers/mod.rs"]
mod helpers;

mod contributions;
mod emission;
mod emitter_defaults;
mod playback;
mod serialization;
mod sub_emitters;
