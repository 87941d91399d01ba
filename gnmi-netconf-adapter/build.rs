fn main() -> Result<(), Box<dyn std::error::Error>> {
    std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    tonic_build::configure()
        .build_client(false) // We only serve the gNMI side
        .compile_protos(
            &["proto/gnmi_ext.proto", "proto/gnmi.proto"],
            &["proto/", "/usr/include"],
        )?;
    Ok(())
}
