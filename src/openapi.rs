//! API description served at `/static/swagger.json`, plus the two HTML
//! pages (landing and Swagger UI).

use serde_json::{json, Value};

pub const DESCRIPTOR_PATH: &str = "/static/swagger.json";
pub const DOCS_PATH: &str = "/api/docs";

const TITLE: &str = "API Cronograma de Estudos";

/// OpenAPI 3.0 document for `/api/cronograma` and `/api/buscar`.
pub fn descriptor() -> Value {
    let lesson = json!({
        "type": "object",
        "properties": {
            "nome": { "type": "string" },
            "link_aula": { "type": "string" },
            "link_gratuito": { "type": "string" }
        }
    });

    json!({
        "openapi": "3.0.0",
        "info": {
            "title": TITLE,
            "description": "Cronograma de estudos agrupado por semana, dia, tema e subtema.",
            "version": env!("CARGO_PKG_VERSION")
        },
        "paths": {
            "/api/cronograma": {
                "get": {
                    "tags": ["Cronograma"],
                    "summary": "Cronograma completo",
                    "description": "Objeto indexado pela chave de cada semana (ex: 'week_1'), em ordem numérica.",
                    "responses": {
                        "200": {
                            "description": "Estrutura completa do cronograma.",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "additionalProperties": { "$ref": "#/components/schemas/Semana" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "/api/buscar": {
                "get": {
                    "tags": ["Busca"],
                    "summary": "Busca por termo",
                    "parameters": [{
                        "name": "q",
                        "in": "query",
                        "required": true,
                        "description": "Termo a ser buscado (ex: 'Cardiologia', 'Clínica Médica', '15/09').",
                        "schema": { "type": "string" }
                    }],
                    "responses": {
                        "200": {
                            "description": "Resultados em ordem de percurso do cronograma.",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": {
                                            "resultados": {
                                                "type": "array",
                                                "items": { "type": "object" }
                                            }
                                        }
                                    }
                                }
                            }
                        },
                        "400": {
                            "description": "Parâmetro 'q' ausente ou vazio.",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Erro" }
                                }
                            }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Aula": lesson,
                "Subtema": {
                    "type": "object",
                    "properties": {
                        "nome": { "type": "string" },
                        "aulas": { "type": "array", "items": { "$ref": "#/components/schemas/Aula" } }
                    }
                },
                "Tema": {
                    "type": "object",
                    "properties": {
                        "nome": { "type": "string" },
                        "subtemas": { "type": "array", "items": { "$ref": "#/components/schemas/Subtema" } }
                    }
                },
                "Dia": {
                    "type": "object",
                    "properties": {
                        "nome": { "type": "string" },
                        "temas": { "type": "array", "items": { "$ref": "#/components/schemas/Tema" } }
                    }
                },
                "Semana": {
                    "type": "object",
                    "properties": {
                        "nome_exibicao": { "type": "string" },
                        "numero": { "type": "integer" },
                        "periodo": { "type": "string" },
                        "area_conhecimento": { "type": "string" },
                        "dias": { "type": "array", "items": { "$ref": "#/components/schemas/Dia" } }
                    }
                },
                "Erro": {
                    "type": "object",
                    "properties": { "error": { "type": "string" } }
                }
            }
        }
    })
}

pub fn landing_page() -> String {
    format!(
        r#"<!doctype html>
<html lang="pt-BR">
<head><meta charset="utf-8"><title>{title}</title></head>
<body>
  <h1>{title}</h1>
  <p>Endpoints disponíveis:</p>
  <ul>
    <li><a href="/api/cronograma">/api/cronograma</a> - cronograma completo, indexado por semana.</li>
    <li><a href="/api/buscar?q=cardio">/api/buscar?q=</a> - busca por termo.</li>
    <li><a href="{docs}">{docs}</a> - documentação Swagger.</li>
  </ul>
</body>
</html>
"#,
        title = TITLE,
        docs = DOCS_PATH
    )
}

pub fn docs_page() -> String {
    format!(
        r##"<!doctype html>
<html lang="pt-BR">
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.ui = SwaggerUIBundle({{ url: "{descriptor}", dom_id: "#swagger-ui" }});
  </script>
</body>
</html>
"##,
        title = TITLE,
        descriptor = DESCRIPTOR_PATH
    )
}
