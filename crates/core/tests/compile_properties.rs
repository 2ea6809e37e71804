//! End-to-end properties of the compiler, driven by the documents in `fixtures/`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::fs;
use std::path::PathBuf;

use routegen_core::{
    CaseConvention, CompileOptions, Error, PROFILES, RawDocument, compile_document, generate_hooks,
    generate_routes,
};
use serde_json::json;

fn fixture(name: &str) -> RawDocument {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    let text = fs::read_to_string(&path).unwrap();
    if name.ends_with(".yaml") {
        RawDocument::from_yaml(&text).unwrap()
    } else {
        RawDocument::from_json(&text).unwrap()
    }
}

fn document(value: serde_json::Value) -> RawDocument {
    RawDocument::from_json(&value.to_string()).unwrap()
}

/// Every use of a declared validator either follows its declaration or sits
/// inside a `z.lazy` thunk.
fn assert_declared_before_use(source: &str) {
    let declarations: Vec<(String, usize)> = source
        .match_indices("const ")
        .filter_map(|(pos, _)| {
            let rest = &source[pos + "const ".len()..];
            let ident: String = rest
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect();
            ident.ends_with("Schema").then_some((ident, pos))
        })
        .collect();
    assert!(!declarations.is_empty(), "no validators in:\n{source}");

    for (ident, declared_at) in &declarations {
        for (used_at, _) in source.match_indices(ident.as_str()) {
            let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
            let next = source[used_at + ident.len()..].chars().next().unwrap_or(' ');
            let prev = source[..used_at].chars().next_back().unwrap_or(' ');
            if is_word(next) || is_word(prev) || used_at == *declared_at + "const ".len() {
                continue;
            }
            let lazy = source[..used_at].ends_with("z.lazy(() => ");
            assert!(
                used_at > *declared_at || lazy,
                "{ident} used before its declaration:\n{source}"
            );
        }
    }
}

#[test]
fn test_end_to_end_default_flags() {
    let out = generate_routes(&fixture("test.json"), &CompileOptions::default()).unwrap();

    assert_eq!(out.matches("const TestSchema = ").count(), 1);
    assert!(!out.contains("export const TestSchema"));
    assert_eq!(out.matches("createRoute({").count(), 1);
    assert!(out.contains("export const postTestRoute = createRoute({\n  method: \"post\",\n  path: \"/test\","));
    assert!(out.contains("          schema: TestSchema,\n"));
    assert!(!out.contains("type Test"));
}

#[test]
fn test_end_to_end_exported_types() {
    let mut options = CompileOptions::default();
    options.schema.export = true;
    options.type_alias.case = CaseConvention::PascalCase;
    options.type_alias.export = true;
    let out = generate_routes(&fixture("test.json"), &options).unwrap();

    assert!(out.contains("export const TestSchema = z.object({\n  test: z.string(),\n}).openapi(\"Test\");"));
    assert!(out.contains("export type Test = z.infer<typeof TestSchema>;"));
    assert!(out.contains("          schema: TestSchema,\n"));
}

#[test]
fn test_output_is_deterministic() {
    let doc = fixture("petstore.yaml");
    let options = CompileOptions::default();
    let first = generate_routes(&doc, &options).unwrap();
    let second = generate_routes(&fixture("petstore.yaml"), &options).unwrap();
    assert_eq!(first, second);

    for profile in PROFILES {
        let first = generate_hooks(&doc, &profile, &options).unwrap();
        let second = generate_hooks(&doc, &profile, &options).unwrap();
        assert_eq!(first, second, "{}", profile.name);
    }
}

#[test]
fn test_dependencies_are_declared_before_use() {
    let out = generate_routes(&fixture("petstore.yaml"), &CompileOptions::default()).unwrap();
    assert_declared_before_use(&out);

    let status = out.find("const PetStatusSchema =").unwrap();
    let new_pet = out.find("const NewPetSchema =").unwrap();
    let pet = out.find("const PetSchema =").unwrap();
    assert!(status < new_pet && new_pet < pet);
}

#[test]
fn test_cycles_use_lazy_references() {
    let out = generate_routes(&fixture("cyclic.json"), &CompileOptions::default()).unwrap();
    assert_declared_before_use(&out);

    assert!(out.contains("type AuthorType = "));
    assert!(out.contains("type BookType = "));
    assert!(!out.contains("type GenreType"));
    assert!(out.contains("const BookSchema: z.ZodType<BookType, z.ZodTypeDef, unknown> = "));
    assert!(out.contains("const AuthorSchema: z.ZodType<AuthorType, z.ZodTypeDef, unknown> = "));
    assert!(out.contains("sequel: z.lazy(() => BookSchema).optional(),"));
    assert!(out.contains("const GenreSchema = z.object({"));
}

#[test]
fn test_case_variants_are_disambiguated() {
    let doc = document(json!({
        "openapi": "3.1.0",
        "paths": {},
        "components": {
            "schemas": {
                "Test": { "type": "string" },
                "test": { "type": "integer" }
            }
        }
    }));
    let out = generate_routes(&doc, &CompileOptions::default()).unwrap();
    assert!(out.contains("const TestSchema = z.string().openapi(\"Test\");"));
    assert!(out.contains("const Test2Schema = z.number().int().openapi(\"test\");"));

    let options = CompileOptions {
        disambiguate: false,
        ..CompileOptions::default()
    };
    let err = generate_routes(&doc, &options).unwrap_err();
    assert!(matches!(err, Error::NamingCollision { .. }), "{err}");
}

#[test]
fn test_path_parameter_correspondence() {
    let missing_param = document(json!({
        "openapi": "3.1.0",
        "paths": {
            "/items/{itemId}": {
                "get": { "responses": { "200": { "description": "OK" } } }
            }
        }
    }));
    let err = generate_routes(&missing_param, &CompileOptions::default()).unwrap_err();
    assert!(matches!(err, Error::OperationBuild { .. }), "{err}");

    let unused_param = document(json!({
        "openapi": "3.1.0",
        "paths": {
            "/items": {
                "get": {
                    "parameters": [
                        { "name": "itemId", "in": "path", "required": true, "schema": { "type": "string" } }
                    ],
                    "responses": { "200": { "description": "OK" } }
                }
            }
        }
    }));
    let err = generate_routes(&unused_param, &CompileOptions::default()).unwrap_err();
    assert!(matches!(err, Error::OperationBuild { .. }), "{err}");
}

#[test]
fn test_petstore_routes() {
    let out = generate_routes(&fixture("petstore.yaml"), &CompileOptions::default()).unwrap();

    assert!(out.contains("const PetStatusSchema = z.enum([\"available\", \"pending\", \"sold\"]).default(\"available\").openapi(\"PetStatus\");"));
    assert!(out.contains("  tags: z.array(z.string()).refine((items) => new Set(items).size === items.length, { message: \"Items must be unique\" }).optional(),\n"));
    assert!(out.contains("  birthday: z.string().date().nullable().optional(),\n"));
    assert!(out.contains("}).passthrough().openapi(\"Problem\");"));

    assert!(out.contains("export const listPetsRoute = createRoute({"));
    assert!(out.contains("  security: [{ apiKey: [] }],\n"));
    assert!(out.contains("      petId: z.string().uuid().openapi({ param: { name: \"petId\", in: \"path\" } }),\n"));
    assert!(out.contains("\"application/problem+json\": {\n          schema: ProblemSchema,\n"));

    let delete = &out[out.find("export const deletePetRoute").unwrap()..];
    assert!(!delete.contains("security"));
}

#[test]
fn test_profiles_cover_every_operation() {
    let compilation = compile_document(&fixture("petstore.yaml"), &CompileOptions::default()).unwrap();
    let fetchers = |source: &str| {
        source
            .lines()
            .filter(|line| line.starts_with("export const ") && line.contains(" = async ("))
            .count()
    };
    for profile in PROFILES {
        let out = compilation.hooks(&profile).unwrap();
        assert_eq!(fetchers(&out), 4, "{}", profile.name);
        assert!(out.contains("export type Pet = "), "{}", profile.name);
        assert!(out.contains("export interface ShowPetByIdParams {\n  petId: string;\n}"), "{}", profile.name);
    }
}

#[test]
fn test_swagger_documents_are_rejected() {
    let err = RawDocument::from_json(r#"{ "swagger": "2.0", "paths": {} }"#).unwrap_err();
    assert!(matches!(err, Error::DocumentParse(_)));
}
