fn main() {
    let out_dir = std::path::PathBuf::from(std::env::var("OUT_DIR").unwrap());

    tonic_build::configure()
        .build_server(true)
        .build_client(false)
        // Always emitted; only read (via `include_bytes!`) when the
        // `reflection` feature is enabled.
        .file_descriptor_set_path(out_dir.join("exposer_descriptor.bin"))
        .compile_protos(&["proto/exposer.proto"], &["proto"])
        .expect("failed to compile exposer.proto");
}
