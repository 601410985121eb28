use tracing::{debug, info};

use crate::{
    ast::{Decl, DeclNode, FuncDecl, Program},
    diagnostics::{to_error_source, SourceArc},
    err_msg,
    macros::{loader, BlockExpander, ExpanderConfig, MacroExpansionStep, MacroTable},
    syntax::{parser, printer},
    ExpandError,
};

// ============================================================================
// DRIVER - One pass over the program's declarations
// ============================================================================

/// Result of expanding one program.
#[derive(Debug, Clone)]
pub struct Expansion {
    /// The input program with calls expanded and definitions removed.
    pub program: Program,
    /// Every macro defined, with bodies as stored (pre-expanded if recursive).
    pub macros: MacroTable,
    /// Every splice, in the order performed.
    pub trace: Vec<MacroExpansionStep>,
}

/// Expands every macro call in `program`.
///
/// Declarations are processed top-down: a macro-marked function is recorded
/// and dropped along with a comment trailing its closing brace, an ordinary
/// function has its body expanded against the macros defined above it,
/// anything else is kept as is. Order is preserved.
pub fn expand_program(
    program: &Program,
    config: &ExpanderConfig,
) -> Result<Expansion, ExpandError> {
    let mut macros = MacroTable::new();
    let mut trace = Vec::new();
    let mut decls = Vec::with_capacity(program.decls.len());

    let mut after_definition = false;

    for decl in &program.decls {
        let follows_definition = std::mem::take(&mut after_definition);
        let Decl::Func(func) = &decl.value else {
            // A trailing comment goes away with the definition it ended.
            let trailing = matches!(&decl.value, Decl::Comment(c) if c.trailing);
            if !(trailing && follows_definition) {
                decls.push(decl.clone());
            }
            continue;
        };

        if let Some(name) = loader::macro_name(func, &config.prefix) {
            let (def, steps) = loader::load_macro(name, func, decl.span, &macros, config)?;
            trace.extend(steps);
            macros.define(def);
            after_definition = true;
            continue;
        }

        let mut expander = BlockExpander::new(&macros);
        let body = expander.expand_block(&func.body)?;
        let steps = expander.into_trace();
        if !steps.is_empty() {
            debug!(function = %func.name, splices = steps.len(), "expanded function body");
        }
        trace.extend(steps);
        decls.push(DeclNode {
            value: Decl::Func(FuncDecl {
                body,
                ..func.clone()
            }),
            span: decl.span,
        });
    }

    info!(
        macros = macros.len(),
        splices = trace.len(),
        "expansion finished"
    );

    Ok(Expansion {
        program: Program {
            leading: program.leading.clone(),
            package: program.package.clone(),
            decls,
        },
        macros,
        trace,
    })
}

// ============================================================================
// EXPANSION PIPELINE - Source text in, source text out
// ============================================================================

/// Parse, expand and format, with diagnostics tied to the named source.
///
/// This is the library-level equivalent of the command line and performs
/// no I/O.
#[derive(Debug, Clone, Default)]
pub struct ExpansionPipeline {
    pub config: ExpanderConfig,
}

impl ExpansionPipeline {
    pub fn new(config: ExpanderConfig) -> Self {
        Self { config }
    }

    /// Parses and expands `source_text`. Errors carry `name` and the text so
    /// they can be rendered with the offending code underlined.
    pub fn expand_source(&self, name: &str, source_text: &str) -> Result<Expansion, ExpandError> {
        let source: SourceArc = to_error_source(name, source_text);
        let program = parser::parse(source_text).map_err(|e| e.with_source(&source))?;
        expand_program(&program, &self.config).map_err(|e| e.with_source(&source))
    }

    /// Expands `source_text` and returns the canonical formatting of the
    /// result.
    pub fn expand_to_string(&self, name: &str, source_text: &str) -> Result<String, ExpandError> {
        let expansion = self.expand_source(name, source_text)?;
        Ok(printer::format_program(&expansion.program))
    }

    /// Serializes a program tree as pretty-printed JSON.
    pub fn program_to_json(program: &Program) -> Result<String, ExpandError> {
        serde_json::to_string_pretty(program)
            .map_err(|e| err_msg!(Io, "failed to serialize program: {}", e))
    }
}
