use super::aspx::AspxScenario;
use super::basic::BasicScenario;
use super::bruteforce::BruteforceScenario;
use super::content_type::ContentTypeScenario;
use super::htaccess::HtaccessScenario;
use super::recursive::RecursiveScenario;
use super::{Scenario, ScenarioKind};

pub fn create_scenario(kind: ScenarioKind) -> Box<dyn Scenario> {
    match kind {
        ScenarioKind::Basic => Box::new(BasicScenario),
        ScenarioKind::Aspx => Box::new(AspxScenario),
        ScenarioKind::Htaccess => Box::new(HtaccessScenario),
        ScenarioKind::Bruteforce => Box::new(BruteforceScenario),
        ScenarioKind::ContentType => Box::new(ContentTypeScenario),
        ScenarioKind::Recursive => Box::new(RecursiveScenario),
    }
}
