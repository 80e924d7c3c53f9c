//! Static lookup tables: dependency → framework, dependency → test framework, tree
//! signatures for CI systems, test configs and lockfiles.
//!
//! Order-sensitive tables are slices; pure lookups are maps built once per process.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Dependency identifier → application framework label.
pub static FRAMEWORKS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // Python
        ("fastapi", "FastAPI"),
        ("django", "Django"),
        ("flask", "Flask"),
        ("starlette", "Starlette"),
        ("tornado", "Tornado"),
        ("sanic", "Sanic"),
        ("litestar", "Litestar"),
        ("aiohttp", "aiohttp"),
        ("bottle", "Bottle"),
        ("falcon", "Falcon"),
        ("quart", "Quart"),
        ("streamlit", "Streamlit"),
        ("gradio", "Gradio"),
        // Node.js / TypeScript
        ("next", "Next.js"),
        ("react", "React"),
        ("vue", "Vue.js"),
        ("angular", "Angular"),
        ("@angular/core", "Angular"),
        ("svelte", "Svelte"),
        ("express", "Express"),
        ("nestjs", "NestJS"),
        ("@nestjs/core", "NestJS"),
        ("nuxt", "Nuxt"),
        ("remix", "Remix"),
        ("@remix-run/react", "Remix"),
        ("gatsby", "Gatsby"),
        ("astro", "Astro"),
        ("hono", "Hono"),
        ("fastify", "Fastify"),
        ("koa", "Koa"),
        ("solid-js", "SolidJS"),
        ("preact", "Preact"),
        // Rust
        ("actix-web", "Actix Web"),
        ("axum", "Axum"),
        ("rocket", "Rocket"),
        ("warp", "Warp"),
        ("tide", "Tide"),
        ("leptos", "Leptos"),
        ("yew", "Yew"),
        ("tauri", "Tauri"),
        // Go
        ("github.com/gin-gonic/gin", "Gin"),
        ("github.com/gofiber/fiber", "Fiber"),
        ("github.com/gofiber/fiber/v2", "Fiber"),
        ("github.com/labstack/echo", "Echo"),
        ("github.com/labstack/echo/v4", "Echo"),
        ("github.com/gorilla/mux", "Gorilla Mux"),
        ("github.com/go-chi/chi", "Chi"),
        ("github.com/go-chi/chi/v5", "Chi"),
        ("github.com/beego/beego", "Beego"),
        // Java / Kotlin
        ("org.springframework.boot:spring-boot-starter-web", "Spring Boot"),
        ("io.quarkus:quarkus-core", "Quarkus"),
        ("io.micronaut:micronaut-core", "Micronaut"),
        ("io.vertx:vertx-core", "Vert.x"),
        ("com.typesafe.play:play_2.13", "Play Framework"),
        ("com.typesafe.play:play_3", "Play Framework"),
        ("io.ktor:ktor-server-core", "Ktor"),
        // Ruby
        ("rails", "Rails"),
        ("sinatra", "Sinatra"),
        ("hanami", "Hanami"),
        // C / C++ (find_package names keep their casing)
        ("Boost", "Boost"),
        ("Qt5", "Qt"),
        ("Qt6", "Qt"),
        ("OpenCV", "OpenCV"),
        ("SFML", "SFML"),
    ])
});

/// Dependency identifier → test framework label.
pub static TEST_FRAMEWORKS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // Python
        ("pytest", "pytest"),
        ("unittest", "unittest"),
        ("nose", "nose"),
        ("nose2", "nose2"),
        // Node.js
        ("jest", "Jest"),
        ("mocha", "Mocha"),
        ("vitest", "Vitest"),
        ("@playwright/test", "Playwright"),
        ("cypress", "Cypress"),
        ("ava", "AVA"),
        ("tap", "tap"),
        // Java / Kotlin
        ("junit", "JUnit"),
        ("org.junit.jupiter:junit-jupiter", "JUnit 5"),
        ("org.junit.jupiter:junit-jupiter-api", "JUnit 5"),
        ("junit:junit", "JUnit 4"),
        ("org.mockito:mockito-core", "Mockito"),
        ("org.testng:testng", "TestNG"),
        // Ruby
        ("rspec", "RSpec"),
        ("rspec-rails", "RSpec"),
        ("minitest", "Minitest"),
    ])
});

/// Config file stem → test framework, checked in order against file basenames.
pub const TEST_CONFIG_FILES: &[(&str, &str)] = &[
    ("jest.config", "Jest"),
    ("vitest.config", "Vitest"),
    ("cypress.config", "Cypress"),
    ("playwright.config", "Playwright"),
    (".mocharc", "Mocha"),
    ("pytest.ini", "pytest"),
    // usually carries a [tool:pytest] section
    ("setup.cfg", "pytest"),
    ("conftest.py", "pytest"),
];

/// How a CI system announces itself in the file tree.
#[derive(Debug, Clone, Copy)]
pub enum CiSignature {
    /// Any file under this directory prefix.
    Prefix(&'static str),
    /// One of these exact root paths.
    Files(&'static [&'static str]),
}

impl CiSignature {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            CiSignature::Prefix(prefix) => path.starts_with(prefix),
            CiSignature::Files(files) => files.contains(&path),
        }
    }
}

/// Every CI system we recognise, in report order.
pub const CI_SYSTEMS: &[(&str, CiSignature)] = &[
    ("GitHub Actions", CiSignature::Prefix(".github/workflows/")),
    ("GitLab CI", CiSignature::Files(&[".gitlab-ci.yml"])),
    ("Jenkins", CiSignature::Files(&["Jenkinsfile"])),
    (
        "CircleCI",
        CiSignature::Files(&[".circleci/config.yml", ".circleci/config.yaml"]),
    ),
    ("Travis CI", CiSignature::Files(&[".travis.yml"])),
    ("Azure Pipelines", CiSignature::Prefix("azure-pipelines")),
    (
        "Bitbucket Pipelines",
        CiSignature::Files(&["bitbucket-pipelines.yml"]),
    ),
];

/// Root lockfile → package manager. The first present entry wins.
pub const LOCKFILES: &[(&str, &str)] = &[
    ("pnpm-lock.yaml", "pnpm"),
    ("yarn.lock", "yarn"),
    ("bun.lockb", "bun"),
    ("bun.lock", "bun"),
    ("package-lock.json", "npm"),
    ("poetry.lock", "poetry"),
    ("Pipfile.lock", "pipenv"),
    ("pdm.lock", "pdm"),
    ("uv.lock", "uv"),
    ("Cargo.lock", "cargo"),
    ("go.sum", "go"),
    ("Gemfile.lock", "bundler"),
    ("gradle.lockfile", "gradle"),
];

/// GitHub primary language → runtime label.
pub static LANGUAGE_RUNTIMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Python", "Python"),
        ("JavaScript", "Node.js"),
        ("TypeScript", "Node.js"),
        ("Rust", "Rust"),
        ("Go", "Go"),
        ("Java", "Java"),
        ("Kotlin", "Kotlin"),
        ("Ruby", "Ruby"),
        ("PHP", "PHP"),
        ("C#", ".NET"),
        ("Swift", "Swift"),
        ("Dart", "Dart"),
        ("C", "C"),
        ("C++", "C++"),
    ])
});

/// Framework label for a dependency: lowercase lookup first, then exact name.
pub fn framework_for(dep: &str) -> Option<&'static str> {
    FRAMEWORKS
        .get(dep.to_lowercase().as_str())
        .or_else(|| FRAMEWORKS.get(dep))
        .copied()
}

pub fn test_framework_for(dep: &str) -> Option<&'static str> {
    TEST_FRAMEWORKS.get(dep.to_lowercase().as_str()).copied()
}
