//! A processing run: descriptors in, validated graph and wiring plan out.

use tracing::{debug, info, warn};

use crate::config::ProcessorConfig;
use crate::descriptors::{InjectionTargetDescriptor, ModuleDescriptor};
use crate::error::ValidationFailure;
use crate::graph::DependencyGraphBuilder;
use crate::validation::{GraphValidator, ValidatedGraph};
use crate::wiring::WiringPlan;

/// Result of a successful run.
#[derive(Debug)]
pub struct ProcessingOutput {
    pub graph: ValidatedGraph,
    pub plan: WiringPlan,
}

/// Builds the global dependency graph from every module, validates it and
/// plans the wiring.
///
/// Any accumulated problem fails the whole run with a single
/// [`ValidationFailure`] and no plan is produced.
///
/// # Examples
///
/// ```
/// use saber_di::{ErrorKind, Key, ModuleDescriptor, Processor, ProcessorConfig, TypeRef};
///
/// let a = Key::of(TypeRef::plain("A"));
/// let b = Key::of(TypeRef::plain("B"));
///
/// let failure = Processor::new(ProcessorConfig::default())
///     .add_module(ModuleDescriptor::new("AppModule").provides("provide_a", a, [b.clone()]))
///     .process()
///     .unwrap_err();
///
/// assert_eq!(failure.keys(ErrorKind::UnresolvedDependency), vec![&b]);
/// assert_eq!(failure.diagnostics[0].location, "AppModule::provide_a");
/// ```
#[derive(Debug, Default)]
pub struct Processor {
    config: ProcessorConfig,
    modules: Vec<ModuleDescriptor>,
    targets: Vec<InjectionTargetDescriptor>,
}

impl Processor {
    pub fn new(config: ProcessorConfig) -> Self {
        Self {
            config,
            modules: Vec::new(),
            targets: Vec::new(),
        }
    }

    pub fn add_module(mut self, module: ModuleDescriptor) -> Self {
        self.modules.push(module);
        self
    }

    pub fn add_modules(mut self, modules: impl IntoIterator<Item = ModuleDescriptor>) -> Self {
        self.modules.extend(modules);
        self
    }

    pub fn add_injection_target(mut self, target: InjectionTargetDescriptor) -> Self {
        self.targets.push(target);
        self
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn process(self) -> Result<ProcessingOutput, ValidationFailure> {
        debug!(
            modules = self.modules.len(),
            targets = self.targets.len(),
            "Processing dependency declarations"
        );
        let mut builder = DependencyGraphBuilder::new();
        for module in &self.modules {
            builder.add_module(module);
        }
        let (graph, diagnostics) = builder.build();

        let graph = GraphValidator::new(&self.config)
            .with_targets(&self.targets)
            .validate(graph, diagnostics)
            .map_err(|failure| {
                warn!(
                    problems = failure.diagnostics.len() + failure.omitted,
                    "Processing failed"
                );
                failure
            })?;

        let plan = WiringPlan::from_graph(&graph);
        info!(providers = graph.len(), instructions = plan.len(), "Processing succeeded");
        Ok(ProcessingOutput { graph, plan })
    }
}
