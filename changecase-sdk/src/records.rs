// ABOUTME: Domain record types mirroring the org's Case and implementation step objects
// ABOUTME: Serde structs carry the exact remote field names via rename attributes

use serde::{Deserialize, Serialize};

/// A change case record. Query projections deserialize into the same type,
/// so every field is optional and absent fields are skipped on serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Case {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    #[serde(rename = "RecordTypeId", skip_serializing_if = "Option::is_none", default)]
    pub record_type_id: Option<String>,
    #[serde(rename = "Status", skip_serializing_if = "Option::is_none", default)]
    pub status: Option<String>,
    #[serde(rename = "Subject", skip_serializing_if = "Option::is_none", default)]
    pub subject: Option<String>,
    #[serde(rename = "BusinessHoursId", skip_serializing_if = "Option::is_none", default)]
    pub business_hours_id: Option<String>,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(rename = "Priority", skip_serializing_if = "Option::is_none", default)]
    pub priority: Option<String>,
    #[serde(rename = "OwnerId", skip_serializing_if = "Option::is_none", default)]
    pub owner_id: Option<String>,
    #[serde(rename = "SM_Backout_Plan__c", skip_serializing_if = "Option::is_none", default)]
    pub backout_plan: Option<String>,
    #[serde(rename = "SM_Risk_Summary__c", skip_serializing_if = "Option::is_none", default)]
    pub risk_summary: Option<String>,
    #[serde(rename = "SM_Verification_Plan__c", skip_serializing_if = "Option::is_none", default)]
    pub verification_plan: Option<String>,
    #[serde(rename = "SM_RMA_Verified_As__c", skip_serializing_if = "Option::is_none", default)]
    pub rma_verified_as: Option<String>,
    #[serde(rename = "SM_Business_Name__c", skip_serializing_if = "Option::is_none", default)]
    pub business_name: Option<String>,
    #[serde(
        rename = "SM_Infrastructure_Type__c",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub infrastructure_type: Option<String>,
    #[serde(rename = "SM_Business_Reason__c", skip_serializing_if = "Option::is_none", default)]
    pub business_reason: Option<String>,
    #[serde(
        rename = "SM_Source_Control_Location__c",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub source_control_location: Option<String>,
    #[serde(
        rename = "SM_Source_Control_Tool__c",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub source_control_tool: Option<String>,
    #[serde(rename = "RMA_Email__c", skip_serializing_if = "Option::is_none", default)]
    pub rma_email: Option<String>,
    #[serde(rename = "SM_ChangeType__c", skip_serializing_if = "Option::is_none", default)]
    pub change_type: Option<String>,
    #[serde(rename = "SM_Change_Category__c", skip_serializing_if = "Option::is_none", default)]
    pub change_category: Option<String>,
    #[serde(
        rename = "How_was_the_rollback_plan_tested__c",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub rollback_plan_tested: Option<String>,
    #[serde(
        rename = "If_Manual_how_was_this_tested__c",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub manual_test_notes: Option<String>,
    #[serde(rename = "Test_Environment__c", skip_serializing_if = "Option::is_none", default)]
    pub test_environment: Option<String>,
    #[serde(rename = "Testing_Method__c", skip_serializing_if = "Option::is_none", default)]
    pub testing_method: Option<String>,
    #[serde(rename = "Was_Rollback_or_rap__c", skip_serializing_if = "Option::is_none", default)]
    pub was_rollback_or_rap: Option<String>,
    #[serde(
        rename = "What_is_the_stagger_plan__c",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub stagger_plan: Option<String>,
    #[serde(rename = "SM_Pipeline__c", skip_serializing_if = "Option::is_none", default)]
    pub pipeline: Option<String>,
    #[serde(rename = "SM_Release__c", skip_serializing_if = "Option::is_none", default)]
    pub release: Option<String>,
    #[serde(rename = "SM_Risk_Level__c", skip_serializing_if = "Option::is_none", default)]
    pub risk_level: Option<String>,
}

impl Case {
    /// Clone the allow-listed template fields into a fresh record.
    /// Everything outside the allow-list (id, status, record type, release)
    /// is left for the caller to set.
    pub fn clone_template_fields(&self) -> Case {
        Case {
            business_hours_id: self.business_hours_id.clone(),
            subject: self.subject.clone(),
            priority: self.priority.clone(),
            description: self.description.clone(),
            backout_plan: self.backout_plan.clone(),
            risk_summary: self.risk_summary.clone(),
            verification_plan: self.verification_plan.clone(),
            rma_verified_as: self.rma_verified_as.clone(),
            business_name: self.business_name.clone(),
            infrastructure_type: self.infrastructure_type.clone(),
            business_reason: self.business_reason.clone(),
            source_control_location: self.source_control_location.clone(),
            source_control_tool: self.source_control_tool.clone(),
            rma_email: self.rma_email.clone(),
            change_type: self.change_type.clone(),
            change_category: self.change_category.clone(),
            rollback_plan_tested: self.rollback_plan_tested.clone(),
            manual_test_notes: self.manual_test_notes.clone(),
            test_environment: self.test_environment.clone(),
            testing_method: self.testing_method.clone(),
            was_rollback_or_rap: self.was_rollback_or_rap.clone(),
            stagger_plan: self.stagger_plan.clone(),
            pipeline: self.pipeline.clone(),
            ..Case::default()
        }
    }

    /// Closed-state classification is a substring match on the status string.
    pub fn is_closed(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.contains(crate::constants::status::CLOSED_MARKER))
    }
}

/// One unit of rollout work attached to a case at creation time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Implementation {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    #[serde(rename = "Description__c", skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(rename = "OwnerId", skip_serializing_if = "Option::is_none", default)]
    pub owner_id: Option<String>,
    #[serde(
        rename = "Configuration_Item_Path_List__c",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub configuration_item_path_list: Option<String>,
    #[serde(
        rename = "SM_Implementation_Steps__c",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub implementation_steps: Option<String>,
    #[serde(
        rename = "SM_Infrastructure_Type__c",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub infrastructure_type: Option<String>,
    #[serde(
        rename = "Planned_Start_Time__c",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub planned_start_time: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(
        rename = "Planned_Duration_In_Hours__c",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub planned_duration_in_hours: Option<f64>,
}

/// Creation payload for the change-cases endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseWithImpl {
    pub change: Case,
    #[serde(rename = "implementationSteps")]
    pub implementation_steps: Vec<Implementation>,
}

/// A bare reference to an implementation step, as stored in the progress
/// file and sent to the start/stop endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRef {
    #[serde(rename = "Id", alias = "id")]
    pub id: String,
}

/// Query projection for lookups that only need the record id.
#[derive(Debug, Clone, Deserialize)]
pub struct IdRecord {
    #[serde(rename = "Id")]
    pub id: String,
}
