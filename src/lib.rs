//! Coursehub - A lightweight learning management system backend
//!
//! This library provides the core functionality for the Coursehub LMS.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
