//! Fixed report catalogs: pillars, curated references, recommendations.
//!
//! Built once at start-up with [`ReportCatalog::builtin`] and passed
//! explicitly to the assembler; never mutated afterwards.

use crate::severity::SeverityLevel;
use crate::types::{
    AssessmentSnapshot, PillarSpec, Recommendation, ReferenceEntry, ScheduledRecommendation,
    Timeframe, normalize_key,
};

/// Default report title.
pub const DEFAULT_TITLE: &str = "EKS Operational Review Report";

/// Fixed executive summary paragraph.
pub const EXECUTIVE_SUMMARY: &str = "This report provides a comprehensive review of the EKS \
cluster operations and identifies key areas for improvement. The assessment covers cluster \
health, cost optimization, security, monitoring, CI/CD, and other critical aspects of the EKS \
infrastructure.";

/// Immutable catalog data that drives section order and content.
#[derive(Debug, Clone)]
pub struct ReportCatalog {
    pub title: String,
    pub executive_summary: String,
    pub pillars: Vec<PillarSpec>,
    pub references: Vec<ReferenceEntry>,
    pub recommendations: Vec<ScheduledRecommendation>,
}

impl ReportCatalog {
    /// The built-in EKS review catalog (6 pillars × 3 fields).
    pub fn builtin() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            executive_summary: EXECUTIVE_SUMMARY.to_string(),
            pillars: builtin_pillars(),
            references: builtin_references(),
            recommendations: builtin_recommendations(),
        }
    }

    /// Replace the title, keeping everything else.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Look up a pillar by (normalized) name.
    pub fn pillar(&self, name: &str) -> Option<&PillarSpec> {
        let name = normalize_key(name);
        self.pillars.iter().find(|p| p.name == name)
    }

    /// Snapshot keys that match no (pillar, field) in this catalog.
    pub fn unmatched_keys(&self, snapshot: &AssessmentSnapshot) -> Vec<(String, String)> {
        snapshot
            .keys()
            .filter(|(pillar, field)| {
                !self
                    .pillar(pillar)
                    .is_some_and(|p| p.fields.iter().any(|f| f == normalize_key(field)))
            })
            .map(|(p, f)| (p.to_string(), f.to_string()))
            .collect()
    }
}

fn pillar(name: &str, description: &str, fields: [&str; 3]) -> PillarSpec {
    PillarSpec {
        name: name.to_string(),
        description: description.to_string(),
        fields: fields.iter().map(|f| (*f).to_string()).collect(),
    }
}

fn builtin_pillars() -> Vec<PillarSpec> {
    vec![
        pillar(
            "Cluster Health",
            "Cluster Status, Node Status, Scheduling issues, etc.",
            ["Cluster Status", "Node Health", "Pod Scheduling Issues"],
        ),
        pillar(
            "Cost Optimization",
            "Cost concerns, unused resources, right-sizing opportunities.",
            ["Resource Utilization", "Cost Allocation", "Optimization Opportunities"],
        ),
        pillar(
            "Security",
            "IAM roles, secrets management, network policies, etc.",
            ["IAM Configuration", "Secret Management", "Network Policies"],
        ),
        pillar(
            "Monitoring",
            "Tooling, dashboards, alerts, metrics setup.",
            ["Monitoring Tools", "Alert Configuration", "Metric Collection"],
        ),
        pillar(
            "CI/CD",
            "Deployment frequency, pipeline tools, rollback strategy.",
            ["Pipeline Setup", "Deployment Strategy", "Rollback Process"],
        ),
        pillar(
            "Others",
            "Kubernetes version, architecture, special needs.",
            ["EKS Version", "Cluster Architecture", "Special Requirements"],
        ),
    ]
}

fn reference(category: &str, link: &str, description: &str) -> ReferenceEntry {
    ReferenceEntry {
        category: category.to_string(),
        link: link.to_string(),
        description: description.to_string(),
    }
}

fn builtin_references() -> Vec<ReferenceEntry> {
    vec![
        reference(
            "Security",
            "https://docs.aws.amazon.com/eks/latest/userguide/security.html",
            "AWS EKS Security Best Practices",
        ),
        reference(
            "Cost Optimization",
            "https://aws.amazon.com/blogs/containers/cost-optimization-for-kubernetes-on-aws/",
            "Cost Optimization for Kubernetes on AWS",
        ),
        reference(
            "Operations",
            "https://aws.github.io/aws-eks-best-practices/",
            "EKS Best Practices Guide",
        ),
        reference(
            "Networking",
            "https://docs.aws.amazon.com/eks/latest/userguide/network_reqs.html",
            "EKS Networking Best Practices",
        ),
    ]
}

fn scheduled(timeframe: Timeframe, text: &str, priority: SeverityLevel) -> ScheduledRecommendation {
    ScheduledRecommendation {
        timeframe,
        recommendation: Recommendation::new(text, priority),
    }
}

fn builtin_recommendations() -> Vec<ScheduledRecommendation> {
    use SeverityLevel::{Critical, High, Low, Medium};
    use Timeframe::{LongTerm, MediumTerm, ShortTerm};

    vec![
        scheduled(ShortTerm, "Implement automated node health checks", High),
        scheduled(ShortTerm, "Configure cluster autoscaling", High),
        scheduled(ShortTerm, "Enable container vulnerability scanning", Critical),
        scheduled(MediumTerm, "Implement GitOps practices", Medium),
        scheduled(MediumTerm, "Set up cross-region disaster recovery", High),
        scheduled(MediumTerm, "Implement cost allocation tags", Medium),
        scheduled(LongTerm, "Migrate to newer EKS version", Medium),
        scheduled(LongTerm, "Implement service mesh", Low),
        scheduled(LongTerm, "Set up multi-cluster management", Medium),
    ]
}

// ---------------------------------------------------------------------------
// Default findings
// ---------------------------------------------------------------------------

impl AssessmentSnapshot {
    /// Sample findings for every (pillar, field) pair; a starting template.
    pub fn defaults() -> Self {
        DEFAULT_FINDINGS
            .iter()
            .fold(Self::new(), |snap, (pillar, field, text)| {
                snap.with(pillar, field, *text)
            })
    }
}

const DEFAULT_FINDINGS: &[(&str, &str, &str)] = &[
    (
        "Cluster Health",
        "Cluster Status",
        "EKS cluster is running in us-west-2 with 3 availability zones. Current control plane \
health is good with no reported issues. API server response time averages 200ms. etcd cluster \
is healthy with no leader elections in past 30 days.",
    ),
    (
        "Cluster Health",
        "Node Health",
        "Running 15 nodes across 3 node groups:
- 8 x m5.2xlarge (Production workloads)
- 4 x c5.xlarge (Batch processing)
- 3 x t3.large (Development workloads)
2 nodes reported kubelet connectivity issues last week. Memory pressure observed on 3 production nodes during peak hours.",
    ),
    (
        "Cluster Health",
        "Pod Scheduling Issues",
        "- 15% pods experiencing scheduling delays due to resource constraints
- 5 pods stuck in Pending state due to PersistentVolume binding issues
- Occasional pod evictions observed due to node memory pressure
- Resource quotas hitting limits during deployment peaks",
    ),
    (
        "Cost Optimization",
        "Resource Utilization",
        "- Average CPU utilization: 45%
- Average Memory utilization: 78%
- 30% of PersistentVolumes underutilized
- Identified 5 idle EBS volumes
- Spot instances not currently utilized",
    ),
    (
        "Cost Optimization",
        "Cost Allocation",
        "- Monthly EKS costs: $2,500
- EC2 instances: $8,000/month
- EBS volumes: $800/month
- No cost allocation tags implemented
- Missing chargeback mechanism for teams",
    ),
    (
        "Cost Optimization",
        "Optimization Opportunities",
        "- Right-sizing potential for 6 nodes
- Spot instance adoption possible for non-critical workloads
- Implement automatic scaling for dev environments
- Storage class optimization needed
- Consider Graviton instances for cost reduction",
    ),
    (
        "Security",
        "IAM Configuration",
        "- IRSA (IAM Roles for Service Accounts) partially implemented
- 5 shared IAM roles identified
- Pod security policies not enforced
- Root account access detected in audit logs
- AWS Security Hub integration missing",
    ),
    (
        "Security",
        "Secret Management",
        "- Using AWS Secrets Manager for 60% of secrets
- Some secrets still in plain ConfigMaps
- External Secrets Operator not implemented
- No secret rotation policy
- Key management using AWS KMS",
    ),
    (
        "Security",
        "Network Policies",
        "- Default deny policies missing
- No microsegmentation implemented
- Calico network policies partially configured
- Public endpoints exposed without WAF
- Security groups need tightening",
    ),
    (
        "Monitoring",
        "Monitoring Tools",
        "- Prometheus/Grafana stack deployed
- AWS CloudWatch Container Insights enabled
- X-Ray tracing implemented for 40% of services
- Custom metrics pipeline using Prometheus Operator
- Logging via EFK stack",
    ),
    (
        "Monitoring",
        "Alert Configuration",
        "- Node-level alerts configured
- Pod-level resource alerts active
- Missing alerts for PV capacity
- SLO/SLI monitoring needed
- No alert correlation system",
    ),
    (
        "Monitoring",
        "Metric Collection",
        "- Custom metrics for business KPIs
- Standard kubernetes metrics collected
- Missing some network flow metrics
- Retention period: 15 days
- Storage optimization needed",
    ),
    (
        "CI/CD",
        "Pipeline Setup",
        "- GitLab CI/CD with ArgoCD
- Image scanning with Trivy
- Automated testing coverage: 75%
- Manual approval gates for production
- Jenkins legacy pipelines still active",
    ),
    (
        "CI/CD",
        "Deployment Strategy",
        "- Mix of rolling updates and blue/green
- No canary deployments implemented
- Average deployment frequency: 8/day
- MTTR (Mean Time to Recovery): 45 mins
- Change failure rate: 12%",
    ),
    (
        "CI/CD",
        "Rollback Process",
        "- Manual rollback procedures
- No automated rollback triggers
- Average rollback time: 15 minutes
- Version control for all deployments
- Missing automatic health checks",
    ),
    (
        "Others",
        "EKS Version",
        "- Currently on EKS 1.24
- Planning upgrade to 1.27
- Add-ons require updates
- Custom admission controllers need compatibility testing
- CNI version: 1.12.0",
    ),
    (
        "Others",
        "Cluster Architecture",
        "- Multi-AZ deployment
- Private networking with VPC endpoints
- Transit Gateway integration
- Direct Connect hybrid connectivity
- Running on EC2 with managed node groups",
    ),
    (
        "Others",
        "Special Requirements",
        "- PCI compliance requirements
- 99.99% uptime SLA
- DR RPO: 15 minutes
- DR RTO: 4 hours
- GPU nodes needed for ML workloads",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_shape() {
        let catalog = ReportCatalog::builtin();
        assert_eq!(catalog.pillars.len(), 6);
        assert!(catalog.pillars.iter().all(|p| p.fields.len() == 3));
        assert_eq!(catalog.pillars[0].name, "Cluster Health");
        assert_eq!(catalog.pillars[5].name, "Others");
        assert_eq!(catalog.references.len(), 4);
        assert_eq!(catalog.recommendations.len(), 9);
    }

    #[test]
    fn defaults_cover_every_pair() {
        let catalog = ReportCatalog::builtin();
        let snap = AssessmentSnapshot::defaults();
        for pillar in &catalog.pillars {
            for field in &pillar.fields {
                assert!(
                    !snap.finding(&pillar.name, field).trim().is_empty(),
                    "missing default for {}/{}",
                    pillar.name,
                    field
                );
            }
        }
        assert!(catalog.unmatched_keys(&snap).is_empty());
    }

    #[test]
    fn unmatched_keys_reports_unknowns() {
        let catalog = ReportCatalog::builtin();
        let snap = AssessmentSnapshot::new()
            .with("Security", "IAM Configuration", "ok")
            .with("Security", "Firewall", "x")
            .with("Networking", "VPC", "y");
        let unmatched = catalog.unmatched_keys(&snap);
        assert_eq!(unmatched.len(), 2);
        assert!(unmatched.contains(&("Security".into(), "Firewall".into())));
        assert!(unmatched.contains(&("Networking".into(), "VPC".into())));
    }

    #[test]
    fn pillar_lookup_normalizes() {
        let catalog = ReportCatalog::builtin();
        assert!(catalog.pillar("🔐 Security").is_some());
        assert!(catalog.pillar("Storage").is_none());
    }
}
