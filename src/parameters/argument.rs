use crate::help::ParameterHelp;

/// A positional argument. Arguments bind in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    name: String,
    help: String,
    required: bool,
    variadic: bool,
}

impl Argument {
    pub fn new(name: impl Into<String>) -> Self {
        Argument {
            name: name.into(),
            help: String::new(),
            required: true,
            variadic: false,
        }
    }

    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Accept any number of values (at least one while required)
    #[must_use]
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    /// Name as shown in usage lines and error messages
    #[must_use]
    pub fn metavar(&self) -> String {
        self.name.to_uppercase()
    }

    #[must_use]
    pub fn parameter_help(&self) -> ParameterHelp {
        ParameterHelp::Argument {
            name: self.name.clone(),
            help: self.help.clone(),
            required: self.required,
            repeatable: self.variadic,
        }
    }
}
