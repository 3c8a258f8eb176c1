mod json_sidecar_store;

pub use json_sidecar_store::JsonSidecarStore;
