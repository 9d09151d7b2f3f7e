//! Integration tests for resource and endpoint generation.

use openapi_markdown::{
    generate, load_document_str, DocumentFormat, DocumentRefs, GenerateError, GenerateOptions,
    Renderer, ResponseSchema,
};
use serde_json::{json, Value};

const PETSTORE: &str = r##"
openapi: 3.0.0
info:
  title: Petstore
  version: 1.0.0
tags:
  - name: pets
    description: Everything about pets
  - name: store
paths:
  /pets:
    post:
      tags: [pets]
      summary: Add a pet
      requestBody:
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/Pet'
      responses:
        201:
          description: Created
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Pet'
        400:
          description: Bad request
    get:
      tags: [pets, store]
      summary: List pets
      parameters:
        - name: limit
          in: query
          schema:
            type: integer
        - name: X-Trace
          in: header
          schema:
            type: string
      responses:
        200:
          description: A list of pets
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: '#/components/schemas/Pet'
  /pets/{id}:
    delete:
      tags: [pets]
      parameters:
        - name: id
          in: path
          required: true
          schema:
            type: string
      responses:
        204:
          description: No content
components:
  schemas:
    Pet:
      type: object
      required: [name]
      properties:
        name:
          type: string
          example: Rex
        owner:
          $ref: '#/components/schemas/Owner'
    Owner:
      type: object
      properties:
        email:
          type: string
    Category:
      type: string
      enum: [dog, cat]
"##;

fn petstore() -> Value {
    load_document_str(PETSTORE, DocumentFormat::Yaml).unwrap()
}

mod resources {
    use super::*;

    #[test]
    fn sorted_by_name_with_examples() {
        let document = petstore();
        let refs = DocumentRefs::new(&document);
        let docs = generate(&document, &refs, &GenerateOptions::new()).unwrap();

        let names: Vec<&str> = docs.resources.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Category", "Owner", "Pet"]);

        let pet = &docs.resources[2];
        assert_eq!(pet.schema["properties"]["owner"]["ref"], "#/components/schemas/Owner");
        assert_eq!(
            pet.example,
            Some(json!({ "name": "Rex", "owner": { "email": "string" } }))
        );
        assert_eq!(docs.resources[0].example, Some(json!("string")));
    }

    #[test]
    fn record_flattens_schema() {
        let document = petstore();
        let refs = DocumentRefs::new(&document);
        let docs = generate(&document, &refs, &GenerateOptions::new()).unwrap();

        let record = docs.resources[0].to_value();
        assert_eq!(
            record,
            json!({ "name": "Category", "type": "string", "enum": ["dog", "cat"], "example": "string" })
        );
    }

    #[test]
    fn resource_depth_limits_expansion() {
        let document = petstore();
        let refs = DocumentRefs::new(&document);
        let options = GenerateOptions::new().resource_schema_depth(Some(1));
        let docs = generate(&document, &refs, &options).unwrap();

        let pet = &docs.resources[2];
        assert_eq!(
            pet.schema["properties"]["owner"],
            json!({ "$ref": "#/components/schemas/Owner" })
        );
        // examples ignore the cutoff
        assert_eq!(
            pet.example,
            Some(json!({ "name": "Rex", "owner": { "email": "string" } }))
        );
    }
}

mod endpoints {
    use super::*;

    #[test]
    fn grouped_by_tag_in_method_order() {
        let document = petstore();
        let refs = DocumentRefs::new(&document);
        let docs = generate(&document, &refs, &GenerateOptions::new()).unwrap();

        let tags: Vec<&str> = docs.groups.iter().map(|g| g.tag.name.as_str()).collect();
        assert_eq!(tags, vec!["pets", "store"]);

        let pets = &docs.groups[0];
        assert_eq!(pets.tag.description.as_deref(), Some("Everything about pets"));
        let routes: Vec<(&str, &str)> = pets
            .endpoints
            .iter()
            .map(|e| (e.method.as_str(), e.path.as_str()))
            .collect();
        assert_eq!(
            routes,
            vec![("get", "/pets"), ("post", "/pets"), ("delete", "/pets/{id}")]
        );

        let store = &docs.groups[1];
        assert_eq!(store.tag.description, None);
        assert_eq!(store.endpoints.len(), 1);
        assert_eq!(store.endpoints[0].tags, vec!["store".to_string()]);
    }

    #[test]
    fn request_body_and_responses() {
        let document = petstore();
        let refs = DocumentRefs::new(&document);
        let docs = generate(&document, &refs, &GenerateOptions::new()).unwrap();

        let post = docs.groups[0]
            .endpoints
            .iter()
            .find(|e| e.method == "post")
            .unwrap();
        assert_eq!(post.request_body_ref.as_deref(), Some("#/components/schemas/Pet"));
        assert_eq!(
            post.request_body_example,
            Some(json!({ "name": "Rex", "owner": { "email": "string" } }))
        );

        let statuses: Vec<&str> = post.responses.keys().map(String::as_str).collect();
        assert_eq!(statuses, vec!["201", "400"]);
        assert_eq!(post.responses["201"].reference.as_deref(), Some("#/components/schemas/Pet"));
        assert_eq!(
            post.responses["400"],
            ResponseSchema {
                description: Some("Bad request".into()),
                ..ResponseSchema::default()
            }
        );
    }

    #[test]
    fn response_without_json_content() {
        let document = petstore();
        let refs = DocumentRefs::new(&document);
        let docs = generate(&document, &refs, &GenerateOptions::new()).unwrap();

        let delete = docs.groups[0]
            .endpoints
            .iter()
            .find(|e| e.method == "delete")
            .unwrap();
        assert_eq!(
            serde_json::to_value(&delete.responses["204"]).unwrap(),
            json!({ "description": "No content" })
        );
        assert_eq!(delete.request_body_schema, None);
        assert_eq!(delete.path_parameters.len(), 1);
        assert_eq!(delete.path_parameters[0]["name"], "id");
    }

    #[test]
    fn parameters_filtered_by_location() {
        let document = petstore();
        let refs = DocumentRefs::new(&document);
        let docs = generate(&document, &refs, &GenerateOptions::new()).unwrap();

        let list = &docs.groups[1].endpoints[0];
        assert!(list.path_parameters.is_empty());
        assert_eq!(list.query_parameters.len(), 1);
        assert_eq!(list.query_parameters[0]["name"], "limit");
    }

    #[test]
    fn endpoint_depth_limits_bodies() {
        let document = petstore();
        let refs = DocumentRefs::new(&document);
        let options = GenerateOptions::new().endpoint_schema_depth(Some(1));
        let docs = generate(&document, &refs, &options).unwrap();

        let list = &docs.groups[1].endpoints[0];
        let schema = list.responses["200"].schema.as_ref().unwrap();
        assert_eq!(schema["items"], json!({ "$ref": "#/components/schemas/Pet" }));
    }

    #[test]
    fn missing_tag_is_an_error() {
        let document = json!({
            "paths": {
                "/health": { "get": { "responses": {} } }
            }
        });
        let refs = DocumentRefs::new(&document);
        let err = generate(&document, &refs, &GenerateOptions::new()).unwrap_err();
        assert!(matches!(err, GenerateError::MissingTag { .. }));
        assert_eq!(err.to_string(), "operation get /health must have a tag");
        assert_eq!(err.exit_code(), 2);
    }
}

mod rendering {
    use super::*;

    #[test]
    fn default_templates_render_petstore() {
        let document = petstore();
        let refs = DocumentRefs::new(&document);
        let docs = generate(&document, &refs, &GenerateOptions::new()).unwrap();
        let renderer = Renderer::new().unwrap();

        let pet = renderer.render_resource(&docs.resources[2]).unwrap();
        assert!(pet.starts_with("# Pet"));
        assert!(pet.contains("[Owner](owner.html)"));
        assert!(pet.contains("\"name\": \"Rex\""));

        let pets = renderer.render_endpoints(&docs.groups[0]).unwrap();
        assert!(pets.starts_with("# pets"));
        assert!(pets.contains("Everything about pets"));
        assert!(pets.contains("`POST /pets`"));
        assert!(pets.contains("#### 204"));
        assert!(pets.contains("No content"));
    }
}
