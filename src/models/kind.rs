//! Workload kind definitions
//!
//! Built-in Kubernetes kinds whose children can be discovered through owner
//! references. Keeps kind strings, API versions and overview paths in one
//! place.

use std::fmt;
use std::str::FromStr;

/// Built-in kinds with known owner-reference children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkloadKind {
    Deployment,
    ReplicaSet,
    StatefulSet,
    DaemonSet,
    CronJob,
    Job,
    Pod,
}

impl WorkloadKind {
    /// Get the kind as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::Deployment => "Deployment",
            WorkloadKind::ReplicaSet => "ReplicaSet",
            WorkloadKind::StatefulSet => "StatefulSet",
            WorkloadKind::DaemonSet => "DaemonSet",
            WorkloadKind::CronJob => "CronJob",
            WorkloadKind::Job => "Job",
            WorkloadKind::Pod => "Pod",
        }
    }

    pub fn api_version(&self) -> &'static str {
        match self {
            WorkloadKind::Deployment
            | WorkloadKind::ReplicaSet
            | WorkloadKind::StatefulSet
            | WorkloadKind::DaemonSet => "apps/v1",
            WorkloadKind::CronJob | WorkloadKind::Job => "batch/v1",
            WorkloadKind::Pod => "v1",
        }
    }

    /// Lowercase plural used in overview paths
    pub fn plural(&self) -> &'static str {
        match self {
            WorkloadKind::Deployment => "deployments",
            WorkloadKind::ReplicaSet => "replica-sets",
            WorkloadKind::StatefulSet => "stateful-sets",
            WorkloadKind::DaemonSet => "daemon-sets",
            WorkloadKind::CronJob => "cron-jobs",
            WorkloadKind::Job => "jobs",
            WorkloadKind::Pod => "pods",
        }
    }

    /// Kinds this kind creates and owns
    pub fn child_kinds(&self) -> &'static [WorkloadKind] {
        match self {
            WorkloadKind::Deployment => &[WorkloadKind::ReplicaSet],
            WorkloadKind::ReplicaSet
            | WorkloadKind::StatefulSet
            | WorkloadKind::DaemonSet
            | WorkloadKind::Job => &[WorkloadKind::Pod],
            WorkloadKind::CronJob => &[WorkloadKind::Job],
            WorkloadKind::Pod => &[],
        }
    }

    /// Try to parse a string into a WorkloadKind, returning None if invalid
    pub fn parse_optional(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    /// Try to parse a string (case-insensitive, with kubectl short names)
    pub fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "deployment" | "deployments" | "deploy" => Some(WorkloadKind::Deployment),
            "replicaset" | "replicasets" | "rs" => Some(WorkloadKind::ReplicaSet),
            "statefulset" | "statefulsets" | "sts" => Some(WorkloadKind::StatefulSet),
            "daemonset" | "daemonsets" | "ds" => Some(WorkloadKind::DaemonSet),
            "cronjob" | "cronjobs" | "cj" => Some(WorkloadKind::CronJob),
            "job" | "jobs" => Some(WorkloadKind::Job),
            "pod" | "pods" | "po" => Some(WorkloadKind::Pod),
            _ => None,
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WorkloadKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Deployment" => Ok(WorkloadKind::Deployment),
            "ReplicaSet" => Ok(WorkloadKind::ReplicaSet),
            "StatefulSet" => Ok(WorkloadKind::StatefulSet),
            "DaemonSet" => Ok(WorkloadKind::DaemonSet),
            "CronJob" => Ok(WorkloadKind::CronJob),
            "Job" => Ok(WorkloadKind::Job),
            "Pod" => Ok(WorkloadKind::Pod),
            _ => Err(format!("Unknown workload kind: {}", s)),
        }
    }
}
