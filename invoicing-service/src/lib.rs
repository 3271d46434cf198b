//! Invoicing Service - invoices over a seeded product and client catalog.

pub mod config;
pub mod dtos;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
