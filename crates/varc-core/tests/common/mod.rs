pub mod vault_server;
