//! Where each entity lives in the store namespace.

use wp_store::{Location, StoreResult};

/// Leaf key of the record describing the container it sits in.
pub const META_KEY: &str = "meta";

const SOCIAL: &str = "social";
const USER: &str = "user";
const PROJECT: &str = "project";
const UPDATE: &str = "update";

/// `social`
pub fn socials() -> StoreResult<Location> {
    Location::from_segments([SOCIAL])
}

/// `user`
pub fn users() -> StoreResult<Location> {
    Location::from_segments([USER])
}

/// `user.<name>`
pub fn user(name: &str) -> StoreResult<Location> {
    Location::from_segments([USER, name])
}

/// `user.<owner>.project`
pub fn projects(owner: &str) -> StoreResult<Location> {
    Location::from_segments([USER, owner, PROJECT])
}

/// `user.<owner>.project.<name>`
pub fn project(owner: &str, name: &str) -> StoreResult<Location> {
    Location::from_segments([USER, owner, PROJECT, name])
}

/// `user.<owner>.project.<name>.update`
pub fn updates(owner: &str, name: &str) -> StoreResult<Location> {
    Location::from_segments([USER, owner, PROJECT, name, UPDATE])
}
