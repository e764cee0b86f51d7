/// What distinguishes one task-history extension from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskHistorySpec {
    pub id: &'static str,
    pub display_name: &'static str,
    /// Extension directory under the editor's `globalStorage`
    pub extension_dir: &'static str,
}

pub const CLINE: TaskHistorySpec = TaskHistorySpec {
    id: "cline",
    display_name: "Cline",
    extension_dir: "saoudrizwan.claude-dev",
};

pub const ROO_CODE: TaskHistorySpec = TaskHistorySpec {
    id: "roo_code",
    display_name: "Roo Code",
    extension_dir: "rooveterinaryinc.roo-cline",
};

pub const KILO_CODE: TaskHistorySpec = TaskHistorySpec {
    id: "kilo_code",
    display_name: "Kilo Code",
    extension_dir: "kilocode.kilo-code",
};
