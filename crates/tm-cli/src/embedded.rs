//! Migration scripts compiled into the binary, selected with
//! `--migrations embedded:`

use rust_embed::Embed;

#[derive(Embed)]
#[folder = "migrations/"]
pub(crate) struct BundledMigrations;
