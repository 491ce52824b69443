#![forbid(unsafe_code)]

pub mod app;
pub mod auth;
pub mod bookmarks;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod formats;
pub mod logging;
pub mod manuals;
pub mod navigator;
pub mod reader;
pub mod search;
pub mod storage;
pub mod views;
