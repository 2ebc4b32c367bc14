pub mod action;
pub mod app;
pub mod clipboard;
pub mod command;
pub mod config;
pub mod domain;
pub mod error;
pub mod event;
pub mod poller;
pub mod ui;
pub mod update;
