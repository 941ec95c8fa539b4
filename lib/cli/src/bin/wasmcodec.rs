use wasmcodec_cli::cli::wasmcodec_main;

fn main() {
    wasmcodec_main();
}
