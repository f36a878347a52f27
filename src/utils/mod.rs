pub mod fillvector;
