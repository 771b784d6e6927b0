#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod board;
mod common;
mod config;
pub mod domain;
mod grid;
mod player;
mod room;
mod ship;
pub mod validator;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
pub mod repository;
#[cfg(feature = "std")]
pub mod service;
#[cfg(feature = "std")]
pub mod skeleton;
#[cfg(feature = "std")]
pub mod stub;
#[cfg(feature = "std")]
pub mod transport;
pub mod prelude;

pub use board::*;
pub use common::*;
pub use config::*;
pub use grid::*;
pub use player::*;
pub use room::*;
pub use ship::*;
#[cfg(feature = "std")]
pub use logging::init_logging;
#[cfg(feature = "std")]
pub use protocol::*;
#[cfg(feature = "std")]
pub use repository::{FileRepository, InMemoryRepository, RoomRepository};
#[cfg(feature = "std")]
pub use service::RoomService;
#[cfg(feature = "std")]
pub use skeleton::Skeleton;
#[cfg(feature = "std")]
pub use stub::Stub;
