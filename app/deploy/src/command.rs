pub mod push;
pub mod redeploy;
