//! Template-based fallback blueprint.
//!
//! Used whenever no generation provider produces text. The document is a pure
//! function of its inputs: identical input always yields byte-identical
//! output, and every input yields a non-empty document.

use crate::models::{parse_features, GenerationRequest, Platform};

/// Features assumed when the user supplied none.
pub const DEFAULT_FEATURES: &[&str] = &["User authentication", "Data management", "Reporting"];

const PLACEHOLDER_IDEA: &str = "Application";

/// Render the fallback blueprint for a validated request.
pub fn fallback_for(request: &GenerationRequest) -> String {
    fallback_blueprint(
        request.idea_description(),
        request.platform(),
        request.target_audience(),
        request.features(),
    )
}

/// Render the fallback blueprint from raw fields.
pub fn fallback_blueprint(
    idea: &str,
    platform: Platform,
    target_audience: Option<&str>,
    features: Option<&str>,
) -> String {
    let idea = match idea.trim() {
        "" => PLACEHOLDER_IDEA,
        trimmed => trimmed,
    };
    let target_audience = target_audience.map(str::trim).filter(|t| !t.is_empty());

    let mut feature_list = features.map(parse_features).unwrap_or_default();
    if feature_list.is_empty() {
        feature_list = DEFAULT_FEATURES.iter().map(|f| f.to_string()).collect();
    }

    let sections = [
        format!("# {} Blueprint", idea),
        executive_summary(idea, platform, target_audience),
        app_overview(idea, platform, target_audience),
        technical_architecture(platform),
        database_design(idea),
        feature_specifications(&feature_list),
        ui_guidelines(&feature_list),
        roadmap(&feature_list),
        STATIC_TAIL.to_string(),
    ];

    sections.join("\n\n")
}

/// File name used when a blueprint is downloaded.
pub fn blueprint_file_name(idea: &str) -> String {
    let mut slug = String::new();
    let mut in_gap = false;
    for c in idea.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
            in_gap = false;
        } else if !in_gap {
            slug.push('_');
            in_gap = true;
        }
    }

    let slug: String = slug.chars().take(50).collect();
    if slug.trim_matches('_').is_empty() {
        "app_blueprint.md".to_string()
    } else {
        format!("{}_blueprint.md", slug)
    }
}

fn entity_name(idea: &str) -> String {
    let first = idea.split_whitespace().next().unwrap_or(PLACEHOLDER_IDEA);
    format!("{}s", first)
}

fn executive_summary(idea: &str, platform: Platform, target: Option<&str>) -> String {
    let mut out = format!(
        "## Executive Summary\n\
         {idea} is a {platform} application designed to {lower}. This blueprint outlines the \
         technical specifications, features, and implementation strategy for developing this \
         application.",
        lower = idea.to_lowercase(),
    );
    if let Some(target) = target {
        out.push_str(&format!(
            "\n\nThe primary target audience is {}, and the application aims to address their \
             specific needs and pain points.",
            target
        ));
    }
    out
}

fn app_overview(idea: &str, platform: Platform, target: Option<&str>) -> String {
    let lower = idea.to_lowercase();
    let mut out = format!(
        "## App Overview\n\
         ### Description\n\
         A comprehensive {platform} application that {lower}, providing users with a seamless \
         and intuitive experience.\n\
         \n\
         ### Purpose and Goals\n\
         - Provide users with a powerful tool to {lower}\n\
         - Streamline processes and improve efficiency\n\
         - Deliver a modern, responsive user interface\n\
         - Ensure security and data privacy"
    );
    if let Some(target) = target {
        out.push_str(&format!(
            "\n\n### Target Audience\n{} who need a solution for {}.",
            target, lower
        ));
    }
    out
}

fn technical_architecture(platform: Platform) -> String {
    let mobile = platform == Platform::Mobile;
    let framework = if mobile { "React Native" } else { "React with Next.js" };
    let ui_library = if mobile { "Native components" } else { "Tailwind CSS" };
    let hosting = if mobile { "App Store/Google Play" } else { "AWS or Vercel" };

    format!(
        "## Technical Architecture\n\
         ### Recommended Tech Stack\n\
         - **Frontend**:\n\
         \x20 - Framework: {framework}\n\
         \x20 - State Management: Redux or Context API\n\
         \x20 - UI Library: {ui_library}\n\
         \x20 - Build Tools: Webpack, Babel\n\
         \n\
         - **Backend**:\n\
         \x20 - Language: Node.js with Express\n\
         \x20 - API: RESTful or GraphQL\n\
         \x20 - Authentication: JWT with OAuth 2.0\n\
         \n\
         - **Database**:\n\
         \x20 - Primary DB: PostgreSQL\n\
         \x20 - Caching: Redis\n\
         \x20 - ORM: Prisma or Sequelize\n\
         \n\
         - **DevOps**:\n\
         \x20 - CI/CD: GitHub Actions\n\
         \x20 - Hosting: {hosting}\n\
         \x20 - Monitoring: Sentry\n\
         \n\
         ### Architecture Overview\n\
         - Microservices architecture for scalability\n\
         - RESTful API design with versioning\n\
         - Responsive UI for all devices\n\
         - Secure authentication flow\n\
         - Data caching for performance"
    )
}

fn database_design(idea: &str) -> String {
    let entity = entity_name(idea);
    format!(
        "## Database Design\n\
         ### Main Entities\n\
         - Users (id, name, email, password_hash, created_at, updated_at)\n\
         - {entity} (id, name, description, user_id, created_at, updated_at)\n\
         - Settings (id, user_id, preferences, notifications)\n\
         \n\
         ### Relationships\n\
         - Users have many {entity}\n\
         - {entity} belong to Users"
    )
}

fn feature_specifications(features: &[String]) -> String {
    let blocks: Vec<String> = features
        .iter()
        .map(|feature| {
            let lower = feature.to_lowercase();
            format!(
                "### {feature}\n\
                 **Description**: Functionality to manage {lower}.\n\
                 \n\
                 **Implementation Details**:\n\
                 - Create a {lower} module\n\
                 - Implement CRUD operations\n\
                 - Add validation and error handling\n\
                 - Design responsive UI components\n\
                 \n\
                 **User Flow**:\n\
                 1. User navigates to {feature} section\n\
                 2. User can view, create, edit, or delete {lower}\n\
                 3. System validates input and provides feedback\n\
                 4. Changes are persisted to the database"
            )
        })
        .collect();

    format!("## Feature Specifications\n\n{}", blocks.join("\n\n"))
}

fn ui_guidelines(features: &[String]) -> String {
    let screens: Vec<String> = features
        .iter()
        .map(|f| format!("- {} Management", f))
        .collect();

    format!(
        "## UI/UX Design Guidelines\n\
         ### Design System\n\
         - Color Palette: Modern, accessible colors with primary and secondary themes\n\
         - Typography: Sans-serif fonts for readability\n\
         - Components: Reusable button, card, form, and navigation components\n\
         - Responsive Design: Mobile-first approach with breakpoints for tablet and desktop\n\
         \n\
         ### Key Screens\n\
         - Login/Registration\n\
         - Dashboard\n\
         {screens}\n\
         - User Profile\n\
         - Settings",
        screens = screens.join("\n")
    )
}

fn roadmap(features: &[String]) -> String {
    // Callers always pass at least the default features.
    let core = features
        .first()
        .map(String::as_str)
        .unwrap_or(DEFAULT_FEATURES[0]);

    format!(
        "## Development Roadmap\n\
         ### Phase 1: MVP (4 weeks)\n\
         - Basic authentication\n\
         - Core {core} functionality\n\
         - Simple UI implementation\n\
         \n\
         ### Phase 2: Core Features (6 weeks)\n\
         - Complete all essential features\n\
         - Refined UI/UX\n\
         - Performance optimizations\n\
         \n\
         ### Phase 3: Advanced Features (4 weeks)\n\
         - Analytics and reporting\n\
         - Advanced customization\n\
         - Third-party integrations"
    )
}

const STATIC_TAIL: &str = "## Testing Strategy
- Unit Testing: Jest for frontend and backend
- Integration Testing: Supertest for API endpoints
- E2E Testing: Cypress or Playwright
- Performance Testing: Lighthouse and JMeter

## Deployment Strategy
- Development environment: Local with Docker
- Staging environment: Cloud provider with CI/CD
- Production environment: Scalable cloud infrastructure
- Blue/green deployment for zero downtime

## Maintenance Plan
- Regular security updates
- Performance monitoring
- User feedback collection
- Quarterly feature updates

This blueprint provides a foundation for a scalable and maintainable application. The next \
steps would be to create detailed wireframes, set up the development environment, and begin \
implementation of the core features.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_idea_and_platform() {
        let doc = fallback_blueprint("Recipe sharing", Platform::Mobile, None, None);
        assert!(doc.starts_with("# Recipe sharing Blueprint\n"));
        assert!(doc.contains("is a mobile application"));
        assert!(doc.contains("Framework: React Native"));
        assert!(doc.contains("Hosting: App Store/Google Play"));
    }

    #[test]
    fn is_deterministic() {
        let a = fallback_blueprint("Todo app", Platform::Web, Some("Students"), Some("a, b"));
        let b = fallback_blueprint("Todo app", Platform::Web, Some("Students"), Some("a, b"));
        assert_eq!(a, b);
    }

    #[test]
    fn uses_default_features_when_none_given() {
        let doc = fallback_blueprint("Todo app", Platform::Web, None, Some("  ,  "));
        for feature in DEFAULT_FEATURES {
            assert!(doc.contains(&format!("### {}\n", feature)));
            assert!(doc.contains(&format!("- {} Management", feature)));
        }
        assert!(doc.contains("- Core User authentication functionality"));
    }

    #[test]
    fn one_subsection_per_feature() {
        let doc = fallback_blueprint("Todo app", Platform::Web, None, Some("add task\ncomplete task"));
        assert!(doc.contains("### add task\n**Description**: Functionality to manage add task."));
        assert!(doc.contains("### complete task\n"));
        assert!(!doc.contains("### Reporting"));
    }

    #[test]
    fn derives_entity_from_first_word() {
        let doc = fallback_blueprint("Garden planner", Platform::Both, None, None);
        assert!(doc.contains("- Gardens (id, name, description, user_id"));
        assert!(doc.contains("- Users have many Gardens"));
    }

    #[test]
    fn audience_sections_only_when_present() {
        let without = fallback_blueprint("Todo app", Platform::Web, None, None);
        assert!(!without.contains("### Target Audience"));

        let with = fallback_blueprint("Todo app", Platform::Web, Some("Students"), None);
        assert!(with.contains("The primary target audience is Students"));
        assert!(with.contains("### Target Audience\nStudents who need a solution for todo app."));
    }

    #[test]
    fn empty_idea_gets_placeholder() {
        let doc = fallback_blueprint("  ", Platform::Web, None, None);
        assert!(doc.starts_with("# Application Blueprint"));
    }

    #[test]
    fn roadmap_has_fixed_phases() {
        let doc = fallback_blueprint("Todo app", Platform::Web, None, None);
        assert!(doc.contains("### Phase 1: MVP (4 weeks)"));
        assert!(doc.contains("### Phase 2: Core Features (6 weeks)"));
        assert!(doc.contains("### Phase 3: Advanced Features (4 weeks)"));
    }

    #[test]
    fn file_name_slugifies_idea() {
        assert_eq!(blueprint_file_name("Todo App!"), "todo_app__blueprint.md");
        assert_eq!(blueprint_file_name("My   Cool  App"), "my_cool_app_blueprint.md");
        assert_eq!(blueprint_file_name("???"), "app_blueprint.md");
        let long = "a".repeat(80);
        assert_eq!(blueprint_file_name(&long), format!("{}_blueprint.md", "a".repeat(50)));
    }
}
