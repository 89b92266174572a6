fn main() {
    // Inventory RPC stubs are generated from hand-written prost messages,
    // so no .proto file or protoc is involved.
    let service = tonic_build::manual::Service::builder()
        .name("InventoryService")
        // Empty package: routes are `/InventoryService/<Method>`.
        .package("")
        .method(
            tonic_build::manual::Method::builder()
                .name("check_item")
                .route_name("CheckItem")
                .input_type("crate::inventory::grpc::ItemRequest")
                .output_type("crate::inventory::grpc::ItemAvailableResponse")
                .codec_path("tonic_prost::ProstCodec")
                .build(),
        )
        .method(
            tonic_build::manual::Method::builder()
                .name("add_item")
                .route_name("AddItem")
                .input_type("crate::inventory::grpc::ItemRequest")
                .output_type("crate::inventory::grpc::Response")
                .codec_path("tonic_prost::ProstCodec")
                .build(),
        )
        .method(
            tonic_build::manual::Method::builder()
                .name("remove_item")
                .route_name("RemoveItem")
                .input_type("crate::inventory::grpc::ItemRequest")
                .output_type("crate::inventory::grpc::Response")
                .codec_path("tonic_prost::ProstCodec")
                .build(),
        )
        .build();

    tonic_build::manual::Builder::new().compile(&[service]);
}
