//! Cross-check between the schema enumerations and the embedded WGSL
//!
//! The schema performs no runtime validation, so this test is what keeps the
//! host-side slot numbers and the shader-side declarations from drifting
//! apart: it reflects both shaders and asserts numeric equality for every
//! shared constant.

use naga::valid::{Capabilities, ValidationFlags, Validator};

use rosegold::renderer::{ACCUMULATE_SHADER, PRESENT_SHADER, WORKGROUP_SIZE};
use rosegold::shader_types::{BufferIndex, TextureIndex, VertexAttribute};

fn parse(source: &str) -> naga::Module {
    naga::front::wgsl::parse_str(source).expect("embedded shader should parse")
}

/// Resolve the (group, binding) pair of a named shader global
fn binding_of(module: &naga::Module, name: &str) -> (u32, u32) {
    for (_, var) in module.global_variables.iter() {
        if var.name.as_deref() == Some(name) {
            let binding = var
                .binding
                .as_ref()
                .unwrap_or_else(|| panic!("global {name} has no resource binding"));
            return (binding.group, binding.binding);
        }
    }
    panic!("no global named {name}");
}

/// Resolve the name of the global at a (group, binding) pair, if any
fn global_at(module: &naga::Module, group: u32, binding: u32) -> Option<String> {
    for (_, var) in module.global_variables.iter() {
        if let Some(resource) = &var.binding {
            if resource.group == group && resource.binding == binding {
                return var.name.clone();
            }
        }
    }
    None
}

#[test]
fn both_shaders_validate() {
    for source in [ACCUMULATE_SHADER, PRESENT_SHADER] {
        let module = parse(source);
        Validator::new(ValidationFlags::all(), Capabilities::all())
            .validate(&module)
            .expect("embedded shader should validate");
    }
}

#[test]
fn kernel_declares_the_schema_slots() {
    let module = parse(ACCUMULATE_SHADER);

    assert_eq!(
        binding_of(&module, "environment"),
        (0, BufferIndex::Environment as u32)
    );
    assert_eq!(
        binding_of(&module, "history"),
        (1, TextureIndex::Input as u32)
    );
    assert_eq!(
        binding_of(&module, "accumulation"),
        (1, TextureIndex::Output as u32)
    );
}

#[test]
fn present_shader_declares_the_schema_slots() {
    let module = parse(PRESENT_SHADER);

    assert_eq!(
        binding_of(&module, "viewport_size"),
        (0, BufferIndex::ViewportSize as u32)
    );
    assert_eq!(
        binding_of(&module, "accumulated"),
        (1, TextureIndex::Output as u32)
    );
}

#[test]
fn vertex_inputs_sit_at_the_schema_locations() {
    let module = parse(PRESENT_SHADER);

    let entry = module
        .entry_points
        .iter()
        .find(|ep| ep.name == "vs_main")
        .expect("vertex entry point");
    let argument = &entry.function.arguments[0];

    let naga::TypeInner::Struct { members, .. } = &module.types[argument.ty].inner else {
        panic!("vertex input should be a struct");
    };

    for member in members {
        let Some(naga::Binding::Location { location, .. }) = &member.binding else {
            panic!("vertex input member without a location");
        };
        match member.name.as_deref() {
            Some("position") => assert_eq!(*location, VertexAttribute::Position as u32),
            Some("tex_coord") => assert_eq!(*location, VertexAttribute::Texcoord as u32),
            other => panic!("unexpected vertex input member {other:?}"),
        }
    }
}

#[test]
fn kernel_workgroup_matches_the_dispatch_math() {
    let module = parse(ACCUMULATE_SHADER);

    let entry = module
        .entry_points
        .iter()
        .find(|ep| ep.name == "main")
        .expect("compute entry point");
    assert_eq!(entry.workgroup_size, [WORKGROUP_SIZE, WORKGROUP_SIZE, 1]);
}

#[test]
fn wiring_the_environment_to_slot_one_would_hit_the_wrong_declaration() {
    // The mistake the contract guards against: binding environment data at
    // slot 1. In the present shader that slot belongs to the viewport size,
    // and in the kernel's buffer group it is not declared at all.
    let present = parse(PRESENT_SHADER);
    assert_eq!(
        global_at(&present, 0, 1).as_deref(),
        Some("viewport_size"),
        "slot 1 carries the viewport size, not the environment"
    );
    assert_ne!(BufferIndex::Environment as u32, 1);

    let kernel = parse(ACCUMULATE_SHADER);
    assert_eq!(global_at(&kernel, 0, 1), None);
    assert_eq!(global_at(&kernel, 0, 2).as_deref(), Some("environment"));
}
