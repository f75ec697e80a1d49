//! Shared metadata document for tests

use super::models::ServiceMetadata;
use super::parse::parse_metadata_str;

pub const SAMPLE_EDMX: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<edmx:Edmx Version="1.0" xmlns:edmx="http://schemas.microsoft.com/ado/2007/06/edmx"
    xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata"
    xmlns:sap="http://www.sap.com/Protocols/SAPData">
  <edmx:DataServices m:DataServiceVersion="2.0">
    <Schema Namespace="SFOData" Alias="sf" xmlns="http://schemas.microsoft.com/ado/2008/09/edm">
      <EntityType Name="User" sap:label="User">
        <Key><PropertyRef Name="userId"/></Key>
        <Property Name="userId" Type="Edm.String" Nullable="false" MaxLength="100"
            sap:label="User ID" sap:required-in-filter="true" sap:filter-restrictions="single-value"/>
        <Property Name="firstName" Type="Edm.String" MaxLength="128" Unicode="true" sap:label="First Name"/>
        <Property Name="hireDate" Type="Edm.DateTime" sap:display-format="Date"/>
        <Property Name="salary" Type="Edm.Decimal" Precision="18" Scale="2" DefaultValue="0"/>
        <Property Name="homeAddress" Type="sf.Address"/>
        <NavigationProperty Name="manager" Relationship="sf.user_manager" FromRole="User" ToRole="manager"/>
        <NavigationProperty Name="empInfo" Relationship="SFOData.user_empInfo" FromRole="User" ToRole="empInfo"/>
      </EntityType>
      <EntityType Name="EmpEmployment">
        <Key><PropertyRef Name="personIdExternal"/><PropertyRef Name="userId"/></Key>
        <Property Name="personIdExternal" Type="Edm.String" Nullable="false" MaxLength="100"/>
        <Property Name="userId" Type="Edm.String" Nullable="false" MaxLength="100"/>
        <Property Name="startDate" Type="Edm.DateTime" Nullable="false"/>
        <NavigationProperty Name="jobInfoNav" Relationship="SFOData.employment_jobInfoNav" FromRole="EmpEmployment" ToRole="jobInfoNav"/>
        <NavigationProperty Name="userNav" Relationship="SFOData.employment_userNav" FromRole="EmpEmployment" ToRole="userNav"/>
      </EntityType>
      <EntityType Name="EmpJob">
        <Key><PropertyRef Name="userId"/><PropertyRef Name="seqNumber"/></Key>
        <Property Name="userId" Type="Edm.String" Nullable="false"/>
        <Property Name="seqNumber" Type="Edm.Int64" Nullable="false"/>
        <Property Name="jobTitle" Type="Edm.String" MaxLength="Max"/>
        <Property Name="company" Type="Edm.String" MaxLength="32" FixedLength="true"/>
        <NavigationProperty Name="employmentNav" Relationship="SFOData.job_employmentNav" FromRole="EmpJob" ToRole="employmentNav"/>
        <NavigationProperty Name="costCenterNav" Relationship="SFOData.job_costCenterNav" FromRole="EmpJob" ToRole="costCenterNav"/>
      </EntityType>
      <EntityType Name="Photo">
        <Key><PropertyRef Name="photoId"/></Key>
        <Property Name="photoId" Type="Edm.Int64" Nullable="false"/>
      </EntityType>
      <ComplexType Name="Address">
        <Property Name="street" Type="Edm.String"/>
        <Property Name="city" Type="Edm.String"/>
        <Property Name="geo" Type="SFOData.GeoPoint"/>
      </ComplexType>
      <ComplexType Name="GeoPoint">
        <Property Name="lat" Type="Edm.Double"/>
        <Property Name="lon" Type="Edm.Double"/>
      </ComplexType>
      <Association Name="user_manager">
        <End Type="SFOData.User" Multiplicity="*" Role="User"/>
        <End Type="SFOData.User" Multiplicity="0..1" Role="manager"/>
      </Association>
      <Association Name="user_empInfo">
        <End Type="SFOData.User" Multiplicity="1" Role="User"/>
        <End Type="SFOData.EmpEmployment" Multiplicity="0..1" Role="empInfo"/>
      </Association>
      <Association Name="employment_jobInfoNav">
        <End Type="SFOData.EmpEmployment" Multiplicity="1" Role="EmpEmployment"/>
        <End Type="SFOData.EmpJob" Multiplicity="*" Role="jobInfoNav"/>
      </Association>
      <Association Name="employment_userNav">
        <End Type="SFOData.EmpEmployment" Multiplicity="*" Role="EmpEmployment"/>
        <End Type="SFOData.User" Multiplicity="1" Role="userNav"/>
      </Association>
      <Association Name="job_employmentNav">
        <End Type="SFOData.EmpJob" Multiplicity="*" Role="EmpJob"/>
        <End Type="SFOData.EmpEmployment" Multiplicity="1" Role="employmentNav"/>
      </Association>
      <EntityContainer Name="EntityContainer" m:IsDefaultEntityContainer="true">
        <EntitySet Name="User" EntityType="SFOData.User" sap:label="User"/>
        <EntitySet Name="EmpEmployment" EntityType="SFOData.EmpEmployment"/>
        <EntitySet Name="EmpJob" EntityType="sf.EmpJob"/>
        <EntitySet Name="Orphan" EntityType="SFOData.Missing"/>
      </EntityContainer>
      <EntityContainer Name="Attachments">
        <EntitySet Name="Photo" EntityType="SFOData.Photo"/>
      </EntityContainer>
    </Schema>
  </edmx:DataServices>
</edmx:Edmx>"#;

pub fn sample_metadata() -> ServiceMetadata {
    parse_metadata_str(SAMPLE_EDMX).expect("sample metadata parses")
}
