//! Social network client and the profile pipeline built on top of it.
//!
//! [`vk`] wraps the VK REST methods the pipeline needs; [`profile`] turns a
//! profile link into a [`profile::ResultDocument`] by resolving the account,
//! fetching wall posts and subscriptions, and assembling the result.
pub mod profile;
pub mod vk;
