//! HTTP request handlers

pub mod commandes;
pub mod fournisseurs;
pub mod health;
pub mod historique;
