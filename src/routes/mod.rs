pub mod dev_proxy;
