//! Integration flows across the key resolver, callback verifier, check
//! lifecycle and gateway, wired exactly as the server binary wires them.

pub mod provider;

#[cfg(test)]
mod flows;
