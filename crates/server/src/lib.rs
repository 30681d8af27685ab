pub mod api;
pub mod config;
pub mod db;
pub mod entity;
pub mod locks;
pub mod ownership;
pub mod repository;
