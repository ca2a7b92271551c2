fn main() -> Result<(), Box<dyn std::error::Error>> {
    let proto_file = "proto/submission.proto";
    let proto_dir = "proto";

    println!("cargo:rerun-if-changed={}", proto_file);

    // Use the bundled compiler unless the environment provides one
    if std::env::var_os("PROTOC").is_none() {
        std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    }

    tonic_build::configure().build_server(false).build_client(true).compile_protos(&[proto_file], &[proto_dir])?;

    Ok(())
}
