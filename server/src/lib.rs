// Life of a request:
// 1. Query string comes in and is folded into QueryParams
// 2. Token parameter is verified when a key is configured
// 3. Filter compiler turns the parameters into a predicate:
//     - Drop reserved and blank parameters
//     - Sanitize field names, encode values by field type
//     - Expand fileId into its stored import id spellings
//     - Anchor on the document kind discriminator
// 4. Store evaluates the statement
// 5. Internal keys are stripped and the result is wrapped in the envelope
//
// System components:
//  - Filter compiler
//  - Document store (in-memory, timeout-bounded)
//  - HTTP route layer

pub mod auth;
pub mod config;
pub mod filter;
pub mod http;
pub mod imports;
pub mod storage;

mod e2e_tests;
#[cfg(test)]
mod testing;
