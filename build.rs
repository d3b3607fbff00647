fn main() {
    // Exposes package and git metadata as `bpctl::built_info`
    built::write_built_file().expect("Failed to acquire build-time information");
}
