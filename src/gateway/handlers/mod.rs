// API endpoint handlers

pub mod chat;
